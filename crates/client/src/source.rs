use async_trait::async_trait;
use codelore_protocol::{
    ApiReply, ArchitectureResponse, DependenciesResponse, Endpoint, EvolutionResponse,
    FileRolesResponse, HealthResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{FetchError, Result};

/// Query surface of the analysis service.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    async fn architecture(&self, repository: &str) -> Result<ArchitectureResponse>;

    async fn file_roles(&self, repository: &str) -> Result<FileRolesResponse>;

    async fn evolution(&self, repository: &str) -> Result<EvolutionResponse>;

    async fn dependencies(&self, repository: &str) -> Result<DependenciesResponse>;

    async fn ping(&self) -> Result<HealthResponse>;
}

#[async_trait]
impl<S: AnalysisSource + ?Sized> AnalysisSource for Arc<S> {
    async fn architecture(&self, repository: &str) -> Result<ArchitectureResponse> {
        (**self).architecture(repository).await
    }

    async fn file_roles(&self, repository: &str) -> Result<FileRolesResponse> {
        (**self).file_roles(repository).await
    }

    async fn evolution(&self, repository: &str) -> Result<EvolutionResponse> {
        (**self).evolution(repository).await
    }

    async fn dependencies(&self, repository: &str) -> Result<DependenciesResponse> {
        (**self).dependencies(repository).await
    }

    async fn ping(&self) -> Result<HealthResponse> {
        (**self).ping().await
    }
}

/// [`AnalysisSource`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisSource {
    client: Client,
    config: ClientConfig,
}

impl HttpAnalysisSource {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| FetchError::Setup(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        repository: Option<&str>,
    ) -> Result<T> {
        let url = self.config.endpoint_url(endpoint);
        let mut request = self.client.get(&url);
        if let Some(repository) = repository {
            request = request.query(&[("url", repository)]);
        }

        log::debug!("GET {url} ({})", endpoint.as_str());
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::transport(endpoint, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::transport(
                endpoint,
                format!("GET {url}: HTTP {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(endpoint, err))?;

        let reply = ApiReply::<T>::from_slice(&body).map_err(|err| FetchError::Decode {
            endpoint,
            detail: err.to_string(),
        })?;
        reply.into_result().map_err(|message| {
            log::debug!("{} reported: {message}", endpoint.as_str());
            FetchError::Source(message)
        })
    }
}

#[async_trait]
impl AnalysisSource for HttpAnalysisSource {
    async fn architecture(&self, repository: &str) -> Result<ArchitectureResponse> {
        self.get(Endpoint::Architecture, Some(repository)).await
    }

    async fn file_roles(&self, repository: &str) -> Result<FileRolesResponse> {
        self.get(Endpoint::FileRoles, Some(repository)).await
    }

    async fn evolution(&self, repository: &str) -> Result<EvolutionResponse> {
        self.get(Endpoint::Evolution, Some(repository)).await
    }

    async fn dependencies(&self, repository: &str) -> Result<DependenciesResponse> {
        self.get(Endpoint::Dependencies, Some(repository)).await
    }

    async fn ping(&self) -> Result<HealthResponse> {
        self.get(Endpoint::Health, None).await
    }
}
