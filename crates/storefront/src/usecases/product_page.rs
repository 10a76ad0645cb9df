use serde::Serialize;
use tracing::{debug, instrument};
use vitrina_core::{ItemId, VariationId};

use super::{
    GetNavigation, GetPaymentMethods, GetProductInfo, GetProductQuestions, GetProductReviews,
    GetSellerInfo, Navigation, PaymentMethodsInfo, ProductInfo, ProductQuestions, ProductReviews,
    SellerInfo, UseCaseResult,
};
use crate::adapters::ProductView;
use crate::marketplace::ReviewFilters;

const RELATED_LIMIT: u32 = 5;
const PAGE_SIZE: u32 = 10;

/// What the page should include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPageOptions {
    pub variation: Option<VariationId>,
    pub include_reviews: bool,
    pub include_questions: bool,
    pub include_related: bool,
    /// Reviews and questions fetched for the page.
    pub page_size: u32,
}

impl Default for ProductPageOptions {
    fn default() -> Self {
        Self {
            variation: None,
            include_reviews: true,
            include_questions: true,
            include_related: true,
            page_size: PAGE_SIZE,
        }
    }
}

/// Everything the product-detail page renders, in one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub product: ProductInfo,
    pub seller: SellerInfo,
    pub reviews: Option<ProductReviews>,
    pub questions: Option<ProductQuestions>,
    pub payment_methods: PaymentMethodsInfo,
    pub navigation: Navigation,
    pub related: Option<Vec<ProductView>>,
}

#[derive(Clone)]
pub struct GetProductPage {
    product_info: GetProductInfo,
    seller_info: GetSellerInfo,
    reviews: GetProductReviews,
    questions: GetProductQuestions,
    payment_methods: GetPaymentMethods,
    navigation: GetNavigation,
}

impl GetProductPage {
    #[must_use]
    pub const fn new(
        product_info: GetProductInfo,
        seller_info: GetSellerInfo,
        reviews: GetProductReviews,
        questions: GetProductQuestions,
        payment_methods: GetPaymentMethods,
        navigation: GetNavigation,
    ) -> Self {
        Self {
            product_info,
            seller_info,
            reviews,
            questions,
            payment_methods,
            navigation,
        }
    }

    /// Loads the product, then its seller, then reviews, questions, payment
    /// methods, navigation and related listings concurrently. The first failure aborts the page.
    ///
    /// # Errors
    ///
    /// Returns the error of the first use case that fails.
    #[instrument(skip(self, options), fields(item_id = %item))]
    pub async fn execute(&self, item: &ItemId, options: &ProductPageOptions) -> UseCaseResult<ProductPage> {
        let product = match &options.variation {
            Some(variation) => {
                self.product_info
                    .execute_with_variation(item, variation)
                    .await?
            }
            None => self.product_info.execute(item).await?,
        };
        let seller = self.seller_info.execute(product.product.seller.id).await?;
        debug!(seller_id = %seller.seller.id, "Seller loaded, fetching page sections");

        let reviews = async {
            if options.include_reviews {
                let filters = ReviewFilters {
                    limit: options.page_size,
                    ..ReviewFilters::default()
                };
                self.reviews.execute(item, filters).await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let questions = async {
            if options.include_questions {
                self.questions
                    .execute(item, Some(options.page_size), None)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let related = async {
            if options.include_related {
                self.product_info.related(item, RELATED_LIMIT).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let (reviews, questions, payment_methods, navigation, related) = tokio::try_join!(
            reviews,
            questions,
            self.payment_methods
                .execute(product.product.seller.id, Some(product.product.price.amount)),
            self.navigation.execute(item),
            related,
        )?;

        Ok(ProductPage {
            product,
            seller,
            reviews,
            questions,
            payment_methods,
            navigation,
            related,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::usecases::testing::fixture_use_cases;

    const IPHONE: &str = "MCO123456789";

    #[tokio::test]
    async fn test_full_page() {
        let page = fixture_use_cases()
            .product_page
            .execute(&ItemId::new(IPHONE), &ProductPageOptions::default())
            .await
            .unwrap();
        assert_eq!(page.product.product.id.as_str(), IPHONE);
        assert_eq!(page.seller.seller.id, page.product.product.seller.id);
        assert!(page.reviews.is_some());
        assert_eq!(page.questions.unwrap().total, 5);
        assert_eq!(page.navigation.breadcrumbs.len(), 4);
        assert!(page.payment_methods.summary.has_interest_free_installments);
        assert!(page.related.is_some());
    }

    #[tokio::test]
    async fn test_sections_can_be_skipped() {
        let options = ProductPageOptions {
            variation: Some(VariationId::new("174997747229")),
            include_reviews: false,
            include_questions: false,
            include_related: false,
            ..ProductPageOptions::default()
        };
        let page = fixture_use_cases()
            .product_page
            .execute(&ItemId::new(IPHONE), &options)
            .await
            .unwrap();
        assert!(page.reviews.is_none());
        assert!(page.questions.is_none());
        assert!(page.related.is_none());
        assert!(page.product.selected_variation.is_some());

        let json = serde_json::to_value(&page).unwrap();
        assert!(json["reviews"].is_null());
        assert!(json.get("paymentMethods").is_some());
    }

    #[tokio::test]
    async fn test_page_size_limits_reviews_and_questions() {
        let options = ProductPageOptions {
            page_size: 2,
            include_related: false,
            ..ProductPageOptions::default()
        };
        let page = fixture_use_cases()
            .product_page
            .execute(&ItemId::new(IPHONE), &options)
            .await
            .unwrap();
        let questions = page.questions.unwrap();
        assert_eq!(questions.limit, 2);
        assert_eq!(questions.questions.len(), 2);
        assert_eq!(questions.total, 5);
        assert!(page.reviews.unwrap().page.reviews.len() <= 2);
    }

    #[tokio::test]
    async fn test_missing_product_fails_whole_page() {
        let err = fixture_use_cases()
            .product_page
            .execute(&ItemId::new("MCO0"), &ProductPageOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
