use serde::Serialize;
use tracing::instrument;
use vitrina_core::{QualityLevel, SellerId, TrustLevel};

use super::{ConcernContext, UseCaseResult};
use crate::adapters::{ReputationView, SellerAdapter, SellerItemView, SellerView};

const CONCERN: &str = "seller information";
const RECENT_ITEMS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    #[serde(flatten)]
    pub seller: SellerView,
    pub recent_items: Vec<SellerItemView>,
    pub total_items: u64,
    pub is_official_store: bool,
    pub trust_level: TrustLevel,
    /// `None` when the reputation carries no metrics.
    pub response_quality: Option<QualityLevel>,
}

fn is_official_store(seller: &SellerView) -> bool {
    seller
        .tags
        .iter()
        .any(|tag| tag == "eshop" || tag == "official_store")
        || seller.eshop.is_some()
}

fn trust_level(reputation: Option<&ReputationView>) -> TrustLevel {
    reputation.map_or(TrustLevel::Unknown, |reputation| {
        TrustLevel::from_transactions(
            reputation.transactions.total,
            reputation.transactions.ratings.positive,
        )
    })
}

/// Mean of the claim, cancellation and delayed-handling scores, where each
/// score is `100 - rate * 100` floored at zero.
fn response_quality(reputation: Option<&ReputationView>) -> Option<QualityLevel> {
    let metrics = reputation?.metrics.as_ref()?;
    let scores = [
        &metrics.claims,
        &metrics.cancellations,
        &metrics.delayed_handling_time,
    ]
    .map(|metric| (100.0 - metric.rate * 100.0).max(0.0));
    let mean = scores.iter().sum::<f64>() / 3.0;
    Some(QualityLevel::from_score(mean))
}

#[derive(Clone)]
pub struct GetSellerInfo {
    seller: SellerAdapter,
}

impl GetSellerInfo {
    #[must_use]
    pub const fn new(seller: SellerAdapter) -> Self {
        Self { seller }
    }

    /// # Errors
    ///
    /// Fails when the seller or their listings cannot be fetched; an unknown
    /// seller is a not-found error.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn execute(&self, id: SellerId) -> UseCaseResult<SellerInfo> {
        let seller = self.seller.get_seller_info(id).await.concerning(CONCERN)?;
        let items = self
            .seller
            .get_seller_items(id, RECENT_ITEMS, 0)
            .await
            .concerning(CONCERN)?;

        let reputation = seller.seller_reputation.as_ref();
        Ok(SellerInfo {
            is_official_store: is_official_store(&seller),
            trust_level: trust_level(reputation),
            response_quality: response_quality(reputation),
            recent_items: items.results,
            total_items: items.paging.total,
            seller,
        })
    }
}
