//! Resource lifecycle controller.
//!
//! Create and update render the record's template and hand the whole
//! document to the apply tool; convergence is left to the tool. Read and
//! delete never touch the cluster.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use k8scrd_runner::{ApplyRunner, ProviderConfiguration};
use k8scrd_templates::TemplateRenderer;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::error::ProviderResult;
use crate::model::ResourceRecord;
use crate::provider::ResourceKind;

/// Identifier assigned to every created resource.
///
/// The apply tool's output is not inspected, so there is nothing to derive
/// a real identifier from.
pub const PLACEHOLDER_ID: &str = "example-id";

/// Drives create/read/update/delete for one resource kind.
pub struct ResourceController {
    kind: ResourceKind,
    renderer: TemplateRenderer,
    runner: Arc<dyn ApplyRunner>,
}

impl ResourceController {
    pub fn new(kind: ResourceKind, runner: Arc<dyn ApplyRunner>) -> Self {
        Self {
            kind,
            renderer: TemplateRenderer::new(),
            runner,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Render the record's template without applying it.
    pub fn render(&self, record: &ResourceRecord) -> ProviderResult<String> {
        let template = record.template.as_deref().ok_or_else(|| {
            Diagnostic::error(
                DiagnosticCode::InvalidArgument,
                "Missing template",
                format!("The {} resource requires a template.", self.kind),
            )
            .with_attribute("template")
        })?;

        self.renderer
            .render(template, record.attributes.as_ref())
            .map_err(|e| {
                warn!("Template rendering failed: {}", e);
                Diagnostic::from(&e).into()
            })
    }

    /// Create a managed resource from `plan`.
    ///
    /// `plan` is left untouched; the returned record carries the applied
    /// document and the assigned identifier.
    pub async fn create(
        &self,
        config: &ProviderConfiguration,
        plan: &ResourceRecord,
    ) -> ProviderResult<ResourceRecord> {
        info!("Creating {} resource", self.kind);

        let applied = self.render_and_apply(config, plan).await?;

        Ok(ResourceRecord {
            attributes: plan.attributes.clone(),
            template: plan.template.clone(),
            applied: Some(applied),
            id: Some(PLACEHOLDER_ID.to_string()),
        })
    }

    /// Return the stored record unchanged. The cluster is not consulted.
    pub async fn read(
        &self,
        _config: &ProviderConfiguration,
        state: &ResourceRecord,
    ) -> ProviderResult<ResourceRecord> {
        debug!("Reading {} resource {:?}", self.kind, state.id);
        Ok(state.clone())
    }

    /// Re-render and re-apply the whole document, keeping the identifier.
    pub async fn update(
        &self,
        config: &ProviderConfiguration,
        plan: &ResourceRecord,
    ) -> ProviderResult<ResourceRecord> {
        info!("Updating {} resource {:?}", self.kind, plan.id);

        let applied = self.render_and_apply(config, plan).await?;
        let id = plan.id.clone().unwrap_or_else(|| {
            warn!("Updated {} resource had no identifier", self.kind);
            PLACEHOLDER_ID.to_string()
        });

        Ok(ResourceRecord {
            attributes: plan.attributes.clone(),
            template: plan.template.clone(),
            applied: Some(applied),
            id: Some(id),
        })
    }

    /// Acknowledge removal from tracked state. Nothing is deleted remotely.
    pub async fn delete(
        &self,
        _config: &ProviderConfiguration,
        state: &ResourceRecord,
    ) -> ProviderResult<()> {
        info!("Forgetting {} resource {:?}", self.kind, state.id);
        Ok(())
    }

    async fn render_and_apply(
        &self,
        config: &ProviderConfiguration,
        plan: &ResourceRecord,
    ) -> ProviderResult<String> {
        let document = self.render(plan)?;
        debug!("Rendered document:\n{}", document);

        match self.runner.apply(config, &document).await {
            Ok(output) => {
                info!(
                    "Applied {} resource to {} in {}ms",
                    self.kind, config.host, output.duration_ms
                );
                Ok(document)
            }
            Err(e) => {
                error!("Applying {} resource failed: {}", self.kind, e);
                Err(Diagnostic::from(&e).into())
            }
        }
    }
}
