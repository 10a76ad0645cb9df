use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use vitrina_core::{
    CartId, CategoryId, ItemId, OrderId, QuestionId, ReviewId, SellerId, SiteId,
};

use super::FixtureError;
use crate::marketplace::{
    Cart, Category, Item, ItemReviews, Order, PaymentMethod, Question, Review, SellerItem,
    ShipmentTracking, ShippingOption, SiteCategory, User, ZipCodeInfo,
};

const PRODUCTS: &str = include_str!("../../fixtures/products.json");
const SELLERS: &str = include_str!("../../fixtures/sellers.json");
const PAYMENTS: &str = include_str!("../../fixtures/payments.json");
const QUESTIONS: &str = include_str!("../../fixtures/questions.json");
const REVIEWS: &str = include_str!("../../fixtures/reviews.json");
const CATEGORIES: &str = include_str!("../../fixtures/categories.json");
const SHIPPING: &str = include_str!("../../fixtures/shipping.json");
const PURCHASES: &str = include_str!("../../fixtures/purchases.json");

#[derive(Deserialize)]
struct ProductsDoc {
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct SellersDoc {
    users: Vec<User>,
    items: BTreeMap<SellerId, Vec<SellerItem>>,
}

#[derive(Deserialize)]
struct CategoriesDoc {
    categories: Vec<Category>,
    site_categories: HashMap<SiteId, Vec<SiteCategory>>,
}

#[derive(Deserialize)]
struct ShippingDoc {
    options: BTreeMap<ItemId, Vec<ShippingOption>>,
    zip_codes: Vec<ZipCodeInfo>,
    tracking: ShipmentTracking,
}

#[derive(Deserialize)]
struct PurchasesDoc {
    carts: Vec<Cart>,
    orders: Vec<Order>,
}

fn parse<T: DeserializeOwned>(name: &'static str, text: &str) -> Result<T, FixtureError> {
    serde_json::from_str(text).map_err(|source| FixtureError::Parse { name, source })
}

/// Every record the fixture backend serves.
#[derive(Debug, Clone, Default)]
pub struct FixtureData {
    pub items: Vec<Item>,
    pub users: Vec<User>,
    pub seller_items: BTreeMap<SellerId, Vec<SellerItem>>,
    pub payment_methods: HashMap<SiteId, Vec<PaymentMethod>>,
    pub questions: BTreeMap<ItemId, Vec<Question>>,
    pub reviews: BTreeMap<ItemId, ItemReviews>,
    pub categories: Vec<Category>,
    pub site_categories: HashMap<SiteId, Vec<SiteCategory>>,
    pub shipping_options: BTreeMap<ItemId, Vec<ShippingOption>>,
    pub zip_codes: Vec<ZipCodeInfo>,
    /// Shape every tracked shipment is reported with.
    pub tracking: ShipmentTracking,
    pub carts: HashMap<CartId, Cart>,
    pub orders: HashMap<OrderId, Order>,
}

impl FixtureData {
    /// Parse the embedded fixture documents.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Parse`] naming the document that failed.
    pub fn load() -> Result<Self, FixtureError> {
        let products: ProductsDoc = parse("products", PRODUCTS)?;
        let sellers: SellersDoc = parse("sellers", SELLERS)?;
        let categories: CategoriesDoc = parse("categories", CATEGORIES)?;
        let shipping: ShippingDoc = parse("shipping", SHIPPING)?;
        let purchases: PurchasesDoc = parse("purchases", PURCHASES)?;

        Ok(Self {
            items: products.items,
            users: sellers.users,
            seller_items: sellers.items,
            payment_methods: parse("payments", PAYMENTS)?,
            questions: parse("questions", QUESTIONS)?,
            reviews: parse("reviews", REVIEWS)?,
            categories: categories.categories,
            site_categories: categories.site_categories,
            shipping_options: shipping.options,
            zip_codes: shipping.zip_codes,
            tracking: shipping.tracking,
            carts: purchases
                .carts
                .into_iter()
                .map(|cart| (cart.id.clone(), cart))
                .collect(),
            orders: purchases
                .orders
                .into_iter()
                .map(|order| (order.id.clone(), order))
                .collect(),
        })
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn user(&self, id: SellerId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values().flatten()
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.all_questions().find(|question| question.id == id)
    }

    pub fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions
            .values_mut()
            .flatten()
            .find(|question| question.id == id)
    }

    /// One past the highest question id in use.
    #[must_use]
    pub fn next_question_id(&self) -> QuestionId {
        let max = self
            .all_questions()
            .map(|question| question.id.as_u64())
            .max()
            .unwrap_or_default();
        QuestionId::new(max + 1)
    }

    pub fn all_reviews(&self) -> impl Iterator<Item = &Review> {
        self.reviews.values().flat_map(|page| page.reviews.iter())
    }

    #[must_use]
    pub fn review(&self, id: &ReviewId) -> Option<&Review> {
        self.all_reviews().find(|review| &review.id == id)
    }

    pub fn review_mut(&mut self, id: &ReviewId) -> Option<&mut Review> {
        self.reviews
            .values_mut()
            .flat_map(|page| page.reviews.iter_mut())
            .find(|review| &review.id == id)
    }

    /// Items listed by `seller`.
    pub fn items_of(&self, seller: SellerId) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.seller_id == seller)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_documents_parse() {
        let data = FixtureData::load().unwrap();
        assert_eq!(data.items.len(), 2);
        assert!(data.item(&ItemId::new("MCO123456789")).is_some());
        assert!(data.user(SellerId::new(123_456)).unwrap().has_tag("eshop"));
        assert!(data.payment_methods.contains_key(&SiteId::Mco));
        assert!(data.carts.contains_key(&CartId::new("cart_123")));
        assert!(data.orders.contains_key(&OrderId::new("order_123456")));
    }

    #[test]
    fn test_next_question_id_is_unused() {
        let data = FixtureData::load().unwrap();
        let next = data.next_question_id();
        assert!(data.question(next).is_none());
        assert!(data.all_questions().all(|q| q.id < next));
    }

    #[test]
    fn test_review_lookup_spans_items() {
        let data = FixtureData::load().unwrap();
        let first = data.all_reviews().next().unwrap().id.clone();
        assert!(data.review(&first).is_some());
        assert!(data.review(&ReviewId::new("missing")).is_none());
    }
}
