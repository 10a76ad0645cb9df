use async_trait::async_trait;
use vitrina_core::SellerId;

use super::ServiceResult;
use crate::marketplace::{SellerStats, User, UserItems};

#[async_trait]
pub trait SellerService: Send + Sync {
    async fn get_user(&self, id: SellerId) -> ServiceResult<User>;

    async fn get_user_items(&self, id: SellerId, limit: u32, offset: u32) -> ServiceResult<UserItems>;

    /// Whether the seller's tags include `eshop`.
    async fn is_official_store(&self, id: SellerId) -> ServiceResult<bool>;

    async fn get_seller_stats(&self, id: SellerId) -> ServiceResult<SellerStats>;
}
