use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use vitrina_core::{CurrencyCode, ItemCondition, ItemId, SellerId};

use super::{AdapterResult, FetchContext};
use crate::marketplace::{Paging, RateMetric, SellerItem, SellerReputation, User, UserItems};
use crate::services::ServiceResolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerView {
    pub id: SellerId,
    pub nickname: String,
    /// Full name when the profile has one, else the nickname.
    pub name: String,
    pub logo: Option<String>,
    pub permalink: Option<String>,
    pub registration_date: Option<DateTime<Utc>>,
    pub country_id: Option<String>,
    pub address: AddressView,
    pub seller_reputation: Option<ReputationView>,
    pub eshop: Option<EshopView>,
    pub tags: Vec<String>,
    pub status: SellerStatusView,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressView {
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EshopView {
    pub eshop_id: Option<u64>,
    pub nick_name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStatusView {
    pub site_status: Option<String>,
    pub allow_listing: bool,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationView {
    pub level_id: Option<String>,
    pub power_seller_status: Option<String>,
    pub transactions: TransactionsView,
    pub metrics: Option<MetricsView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsView {
    pub period: Option<String>,
    pub total: u64,
    pub completed: u64,
    pub canceled: u64,
    pub ratings: RatingsView,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingsView {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub sales: SalesView,
    pub claims: RateView,
    pub delayed_handling_time: RateView,
    pub cancellations: RateView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesView {
    pub period: Option<String>,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateView {
    pub period: Option<String>,
    pub rate: f64,
    pub value: u64,
}

impl From<&RateMetric> for RateView {
    fn from(metric: &RateMetric) -> Self {
        Self {
            period: metric.period.clone(),
            rate: metric.rate,
            value: metric.value,
        }
    }
}

impl From<&SellerReputation> for ReputationView {
    fn from(reputation: &SellerReputation) -> Self {
        let transactions = &reputation.transactions;
        Self {
            level_id: reputation.level_id.clone(),
            power_seller_status: reputation.power_seller_status.clone(),
            transactions: TransactionsView {
                period: transactions.period.clone(),
                total: transactions.total,
                completed: transactions.completed,
                canceled: transactions.canceled,
                ratings: RatingsView {
                    negative: transactions.ratings.negative,
                    neutral: transactions.ratings.neutral,
                    positive: transactions.ratings.positive,
                },
            },
            metrics: reputation.metrics.as_ref().map(|metrics| MetricsView {
                sales: SalesView {
                    period: metrics.sales.period.clone(),
                    completed: metrics.sales.completed,
                },
                claims: RateView::from(&metrics.claims),
                delayed_handling_time: RateView::from(&metrics.delayed_handling_time),
                cancellations: RateView::from(&metrics.cancellations),
            }),
        }
    }
}

fn display_name(user: &User) -> String {
    let parts: Vec<&str> = [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();
    if parts.is_empty() {
        user.nickname.clone()
    } else {
        parts.join(" ")
    }
}

impl From<&User> for SellerView {
    fn from(user: &User) -> Self {
        let address = user.address.clone().unwrap_or_default();
        let status = user.status.clone().unwrap_or_default();
        let listing = status.list.unwrap_or_default();
        Self {
            id: user.id,
            nickname: user.nickname.clone(),
            name: display_name(user),
            logo: user.logo.clone(),
            permalink: user.permalink.clone(),
            registration_date: user.registration_date,
            country_id: user.country_id.clone(),
            address: AddressView {
                city: address.city,
                state: address.state,
            },
            seller_reputation: user.seller_reputation.as_ref().map(ReputationView::from),
            eshop: user.eshop.as_ref().map(|eshop| EshopView {
                eshop_id: eshop.eshop_id,
                nick_name: eshop.nick_name.clone(),
                logo_url: eshop.eshop_logo_url.clone(),
            }),
            tags: user.tags.clone(),
            status: SellerStatusView {
                site_status: status.site_status,
                allow_listing: listing.allow,
                codes: listing.codes,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerItemsView {
    pub seller_id: SellerId,
    pub query: Option<String>,
    pub paging: Paging,
    pub results: Vec<SellerItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerItemView {
    pub id: ItemId,
    pub title: String,
    pub price: Decimal,
    pub currency_id: CurrencyCode,
    pub available_quantity: u32,
    pub sold_quantity: u32,
    pub condition: ItemCondition,
    pub thumbnail: Option<String>,
    pub permalink: Option<String>,
}

impl From<&SellerItem> for SellerItemView {
    fn from(item: &SellerItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            price: item.price,
            currency_id: item.currency_id.unwrap_or_default(),
            available_quantity: item.available_quantity,
            sold_quantity: item.sold_quantity,
            condition: item.condition,
            thumbnail: item.thumbnail.clone(),
            permalink: item.permalink.clone(),
        }
    }
}

impl From<UserItems> for SellerItemsView {
    fn from(items: UserItems) -> Self {
        Self {
            seller_id: items.seller_id,
            query: items.query,
            paging: items.paging,
            results: items.results.iter().map(SellerItemView::from).collect(),
        }
    }
}

#[derive(Clone)]
pub struct SellerAdapter {
    services: ServiceResolver,
}

impl SellerAdapter {
    #[must_use]
    pub const fn new(services: ServiceResolver) -> Self {
        Self { services }
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the user cannot be fetched.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn get_seller_info(&self, id: SellerId) -> AdapterResult<SellerView> {
        let user = self
            .services
            .call(|services| services.seller.get_user(id))
            .await
            .fetching("seller info")?;
        Ok(SellerView::from(&user))
    }

    /// # Errors
    ///
    /// Returns [`super::AdapterError`] when the listings cannot be fetched.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn get_seller_items(&self, id: SellerId, limit: u32, offset: u32) -> AdapterResult<SellerItemsView> {
        let items = self
            .services
            .call(|services| services.seller.get_user_items(id, limit, offset))
            .await
            .fetching("seller items")?;
        Ok(SellerItemsView::from(items))
    }
}
