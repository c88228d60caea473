//! External collaborators: the identity provider and the fitness REST API.
//!
//! Both sit behind narrow traits so the credential manager and the export
//! driver can run against fakes.

use anyhow::Result;
use serde_json::Value;

use crate::config::export::TimeWindow;
use crate::credentials::{Credential, TokenGrant};

pub mod callback;
pub mod client_secret;
pub mod google_fit;
pub mod oauth2;

pub trait IdentityProvider {
    /// Interactive authorization. Blocks until the user completes consent.
    fn authorize(&self) -> impl std::future::Future<Output = Result<Credential>> + Send;

    /// Refresh grant for a credential that carries a refresh token.
    fn refresh(
        &self,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<TokenGrant>> + Send;
}

pub trait FitnessApi {
    /// Raw listing of the data sources of `data_type`.
    fn list_data_sources(
        &self,
        data_type: &str,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// Raw dataset of one data source over `window`.
    fn get_dataset(
        &self,
        data_source_id: &str,
        window: &TimeWindow,
    ) -> impl std::future::Future<Output = Result<Value>> + Send;
}
