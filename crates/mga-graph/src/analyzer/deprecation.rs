use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use mga_core::dmr::{self, REASON, SINCE};
use mga_core::{ModelReader, Version};

use super::{Analyzer, Run};
use crate::cypher::Cypher;
use crate::statements;
use crate::writer::GraphWriter;

impl<R, W> Analyzer<'_, R, W>
where
    R: ModelReader + ?Sized,
    W: GraphWriter + ?Sized,
{
    /// Link the entity matched by `target` as `var` to the version it was
    /// deprecated in. A malformed version is recorded as an error in the
    /// statistics and leaves the entity without the edge.
    pub(super) async fn deprecated(
        &self,
        run: &mut Run,
        deprecated: &Value,
        target: Cypher,
        var: &str,
        context: impl FnOnce() -> String,
    ) -> Result<()> {
        let since = dmr::defined(deprecated, SINCE).map(dmr::as_string).unwrap_or_default();
        let reason = dmr::defined(deprecated, REASON).map(dmr::as_string).unwrap_or_default();

        match Version::parse(&since) {
            Ok(version) => {
                let created = self
                    .execute(&statements::deprecated_since(target, var, &version, &reason))
                    .await?;
                run.stats.relationships += created.relationships_created;
            }
            Err(_) => {
                let context = context();
                warn!(%since, %context, "Invalid deprecation version");
                run.stats.error(format!(
                    "Unable to parse deprecation version '{since}' for '{context}'"
                ));
            }
        }
        Ok(())
    }
}
