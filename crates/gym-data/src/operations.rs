use anyhow::Result;
use async_trait::async_trait;

use crate::{Member, Payment};

#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Update<T> {
    async fn update(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

#[async_trait]
pub trait Delete<T> {
    async fn delete(&self, item: T) -> Result<()>;
}

/// Insert a new member together with its first payment.
/// Both records are written or none is.
#[async_trait]
pub trait Enroll {
    async fn enroll(
        &self,
        member: Member,
        payment: Payment,
    ) -> Result<(Member, Payment)>;
}

/// Record a payment and extend the paying member in a
/// single transaction.
///
/// `extend` is given the member as stored when the transaction
/// starts. Only the expiry date and status of its result are
/// written back.
#[async_trait]
pub trait Renew {
    async fn renew<F>(
        &self,
        payment: Payment,
        extend: F,
    ) -> Result<(Member, Payment)>
    where
        F: FnOnce(&Member) -> Result<Member> + Send;
}
