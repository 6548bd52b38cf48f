use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::CatalogClient;
use crate::config::ResolvedConfig;
use crate::domain::QueryParameters;
use crate::error::OdeError;
use crate::grouper::{GroupingPolicy, PRODUCT_TAG, ResultMapping, group_products};
use crate::query::build_query_url;
use crate::xml::XmlDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub policy: GroupingPolicy,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub url: String,
    pub policy: GroupingPolicy,
    pub products: usize,
    pub groups: ResultMapping,
}

#[derive(Clone)]
pub struct App<C: CatalogClient> {
    client: C,
    config: ResolvedConfig,
}

impl<C: CatalogClient> App<C> {
    pub fn new(client: C, config: ResolvedConfig) -> Self {
        Self { client, config }
    }

    /// Picks the grouping policy and composes the request URL without any I/O.
    pub fn plan(&self, params: &QueryParameters) -> Result<QueryPlan, OdeError> {
        let policy = GroupingPolicy::select(&params.target, &params.ihid, &params.iid)?;
        let url = build_query_url(&self.config.endpoint, policy.product_type(), params);
        Ok(QueryPlan { policy, url })
    }

    pub fn query(&self, params: &QueryParameters) -> Result<QueryOutcome, OdeError> {
        let QueryPlan { policy, url } = self.plan(params)?;
        info!(%policy, %url, "querying ODE catalog");

        let body = self.client.fetch_catalog(&url)?;
        debug!(bytes = body.len(), "catalog received");

        let document = XmlDocument::parse(&body)?;
        let products = document.elements_by_tag(PRODUCT_TAG).len();
        let groups = group_products(&document, policy);
        debug!(
            products,
            groups = groups.len(),
            unassigned = groups.get_unassigned().is_some(),
            "catalog grouped"
        );

        Ok(QueryOutcome {
            url,
            policy,
            products,
            groups,
        })
    }
}
