//! `completion/complete`: prefix completion over resource URIs.

use crate::context::ServerContext;
use crate::resources::ResourceRegistry;
use crate::types::{CompleteParams, CompleteResult, Completion};

/// Upper bound on values returned in one completion.
pub const MAX_COMPLETIONS: usize = 100;

const RESOURCE_REF: &str = "ref/resource";

pub async fn complete(params: &CompleteParams, ctx: &ServerContext) -> CompleteResult {
    if params.reference.ref_type != RESOURCE_REF {
        tracing::debug!(
            "No completions for reference type {}",
            params.reference.ref_type
        );
        return CompleteResult::empty();
    }

    let uris: Vec<String> = ResourceRegistry::list_resources(ctx)
        .await
        .into_iter()
        .map(|r| r.uri)
        .filter(|uri| uri.starts_with(&params.argument.value))
        .collect();

    complete_from(uris)
}

fn complete_from(mut values: Vec<String>) -> CompleteResult {
    let total = values.len();
    values.truncate(MAX_COMPLETIONS);
    CompleteResult {
        completion: Completion {
            has_more: total > values.len(),
            total: Some(total),
            values,
        },
    }
}
