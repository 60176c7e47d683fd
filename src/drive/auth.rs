//! Google Drive authentication

use crate::drive::config::ClientConfig;
use crate::drive::error::DriveError;
use hyper_util::client::legacy::connect::HttpConnector;
use google_drive3::DriveHub;
use hyper_rustls::HttpsConnector;
use tracing::info;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub type AuthenticatedHub = DriveHub<HttpsConnector<HttpConnector>>;

pub struct DriveAuth;

impl DriveAuth {
    /// Runs the installed-application OAuth flow, reusing the token cached in
    /// `StoredCredential` when one is present.
    pub async fn create_hub(config: &ClientConfig) -> Result<AuthenticatedHub, DriveError> {
        let secrets_path = config.client_secrets_path();

        let _ = rustls::crypto::ring::default_provider().install_default();

        let secret = yup_oauth2::read_application_secret(&secrets_path)
            .await
            .map_err(|e| {
                DriveError::io(
                    &secrets_path,
                    std::io::Error::new(
                        e.kind(),
                        format!("Failed to read client secrets: {}", e),
                    ),
                )
            })?;

        let auth = InstalledFlowAuthenticator::builder(
            secret,
            InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(config.token_cache_path())
        .build()
        .await
        .map_err(|e| DriveError::Auth(format!("Failed to build authenticator: {}", e)))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| DriveError::Auth(format!("Failed to load native roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let hub = DriveHub::new(
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector),
            auth,
        );

        info!("Authenticated {} client", config.client_name);
        Ok(hub)
    }
}
