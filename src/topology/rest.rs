//! HTTP/JSON REST binding for the topology client.
//!
//! # Responsibilities
//! - Issue `GET {base}/Applications[...]?api-version=X` queries
//! - Decode the `{ContinuationToken, Items}` envelope
//! - Map wire DTOs onto the transport-neutral refs
//!
//! # Design Decisions
//! - The body is fetched as text and decoded with serde_json so transport
//!   and decode failures stay distinguishable in the error taxonomy
//! - Continuation tokens travel as the `ContinuationToken` query parameter
//! - Replica items carry `ReplicaId` for stateful services and `InstanceId`
//!   for stateless ones; both map onto the same ref field

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::pager::Page;
use super::{
    strip_scheme, ApplicationRef, PartitionRef, QueryErrorKind, QueryLevel, ReplicaRef,
    ServiceRef, TopologyClient, TopologyError,
};

/// Topology client speaking the cluster manager's REST API.
#[derive(Debug, Clone)]
pub struct RestTopologyClient {
    http: reqwest::Client,
    base: Url,
    api_version: String,
}

impl RestTopologyClient {
    pub fn new(base: Url, api_version: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base, api_version)
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, connection caps).
    pub fn with_client(http: reqwest::Client, base: Url, api_version: impl Into<String>) -> Self {
        Self {
            http,
            base,
            api_version: api_version.into(),
        }
    }

    fn fail(&self, level: QueryLevel, parent: &Option<String>, kind: QueryErrorKind) -> TopologyError {
        TopologyError::new(level, parent.clone(), kind)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        level: QueryLevel,
        parent: Option<String>,
        path: String,
        token: Option<&str>,
    ) -> Result<(Vec<T>, Option<String>), TopologyError> {
        let url = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path);
        let mut request = self
            .http
            .get(&url)
            .query(&[("api-version", self.api_version.as_str())]);
        if let Some(token) = token {
            request = request.query(&[("ContinuationToken", token)]);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| self.fail(level, &parent, e.into()))?;
        let body = response
            .text()
            .await
            .map_err(|e| self.fail(level, &parent, e.into()))?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| self.fail(level, &parent, e.into()))?;
        Ok((envelope.items, envelope.continuation_token))
    }
}

impl TopologyClient for RestTopologyClient {
    fn applications<'a>(
        &'a self,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ApplicationRef>, TopologyError>> {
        Box::pin(async move {
            let (items, next) = self
                .fetch_page::<ApplicationDto>(
                    QueryLevel::Applications,
                    None,
                    "Applications".to_string(),
                    token,
                )
                .await?;
            Ok(Page {
                items: items.into_iter().map(ApplicationDto::into_ref).collect(),
                continuation_token: next,
            })
        })
    }

    fn services<'a>(
        &'a self,
        app: &'a ApplicationRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ServiceRef>, TopologyError>> {
        Box::pin(async move {
            let (items, next) = self
                .fetch_page::<ServiceDto>(
                    QueryLevel::Services,
                    Some(app.name.clone()),
                    format!("Applications/{}/$/GetServices", app.id),
                    token,
                )
                .await?;
            Ok(Page {
                items: items.into_iter().map(ServiceDto::into_ref).collect(),
                continuation_token: next,
            })
        })
    }

    fn partitions<'a>(
        &'a self,
        app: &'a ApplicationRef,
        service: &'a ServiceRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<PartitionRef>, TopologyError>> {
        Box::pin(async move {
            let (items, next) = self
                .fetch_page::<PartitionDto>(
                    QueryLevel::Partitions,
                    Some(service.name.clone()),
                    format!(
                        "Applications/{}/$/GetServices/{}/$/GetPartitions",
                        app.id, service.id
                    ),
                    token,
                )
                .await?;
            Ok(Page {
                items: items.into_iter().map(PartitionDto::into_ref).collect(),
                continuation_token: next,
            })
        })
    }

    fn replicas<'a>(
        &'a self,
        app: &'a ApplicationRef,
        service: &'a ServiceRef,
        partition: &'a PartitionRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ReplicaRef>, TopologyError>> {
        Box::pin(async move {
            let (items, next) = self
                .fetch_page::<ReplicaDto>(
                    QueryLevel::Replicas,
                    Some(partition.id.clone()),
                    format!(
                        "Applications/{}/$/GetServices/{}/$/GetPartitions/{}/$/GetReplicas",
                        app.id, service.id, partition.id
                    ),
                    token,
                )
                .await?;
            Ok(Page {
                items: items.into_iter().map(ReplicaDto::into_ref).collect(),
                continuation_token: next,
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "ContinuationToken", default)]
    continuation_token: Option<String>,
    #[serde(rename = "Items", default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApplicationDto {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Id", default)]
    id: Option<String>,
}

impl ApplicationDto {
    fn into_ref(self) -> ApplicationRef {
        let id = self
            .id
            .unwrap_or_else(|| strip_scheme(&self.name).to_string());
        ApplicationRef {
            name: self.name,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceDto {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Id", default)]
    id: Option<String>,
}

impl ServiceDto {
    fn into_ref(self) -> ServiceRef {
        let id = self
            .id
            .unwrap_or_else(|| strip_scheme(&self.name).to_string());
        ServiceRef {
            name: self.name,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PartitionInformationDto {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct PartitionDto {
    #[serde(rename = "PartitionInformation")]
    partition_information: PartitionInformationDto,
}

impl PartitionDto {
    fn into_ref(self) -> PartitionRef {
        PartitionRef {
            id: self.partition_information.id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplicaDto {
    #[serde(rename = "InstanceId", alias = "ReplicaId")]
    id: String,
    #[serde(rename = "Address", default)]
    address: String,
}

impl ReplicaDto {
    fn into_ref(self) -> ReplicaRef {
        ReplicaRef {
            id: self.id,
            address: self.address,
        }
    }
}
