//! Endpoints outside the core list/get surface
//!
//! Incident custom fields, incident business-service impact, and the two
//! service dependency lookups.

use super::client::PagerDutyClient;
use super::models::{
    BusinessServiceImpact, CustomFieldValue, CustomFieldsResponse, ImpactsResponse, Relationship,
    RelationshipsResponse,
};
use crate::error::Result;
use crate::http::{path_segment, RequestConfig};

impl PagerDutyClient {
    /// Custom field values set on an incident
    pub async fn incident_custom_fields(&self, incident_id: &str) -> Result<Vec<CustomFieldValue>> {
        let path = format!("/incidents/{}/custom_fields/values", path_segment(incident_id)?);
        let body: CustomFieldsResponse = self.http().get_json(&path, RequestConfig::new()).await?;
        Ok(body.custom_fields)
    }

    /// Business services impacted by an incident
    pub async fn incident_business_service_impacts(
        &self,
        incident_id: &str,
    ) -> Result<Vec<BusinessServiceImpact>> {
        let path = format!(
            "/incidents/{}/business_services/impacts",
            path_segment(incident_id)?
        );
        let body: ImpactsResponse = self.http().get_json(&path, RequestConfig::new()).await?;
        Ok(body.services)
    }

    /// Dependency edges of a technical service
    pub async fn technical_service_dependencies(
        &self,
        service_id: &str,
    ) -> Result<Vec<Relationship>> {
        let path = format!(
            "/service_dependencies/technical_services/{}",
            path_segment(service_id)?
        );
        self.relationships(&path).await
    }

    /// Dependency edges of a business service
    pub async fn business_service_dependencies(
        &self,
        service_id: &str,
    ) -> Result<Vec<Relationship>> {
        let path = format!(
            "/service_dependencies/business_services/{}",
            path_segment(service_id)?
        );
        self.relationships(&path).await
    }

    async fn relationships(&self, path: &str) -> Result<Vec<Relationship>> {
        let body: RelationshipsResponse = self.http().get_json(path, RequestConfig::new()).await?;
        Ok(body.relationships)
    }
}
