//! Resolvers: dressing, diffing by `(typeName, fieldName)`, and request
//! construction. Template bodies must be inline by the time they get here.

use mobilehub_core::diff::{actionable, reconcile as reconcile_with};
use mobilehub_core::models::resolver::{Resolver, TemplateDirection};
use mobilehub_core::Diffed;

use crate::error::ProvisionerError;
use crate::params::ResolverParams;

pub fn dress_for_dev_backend(mut resolver: Resolver) -> Resolver {
    resolver.resolver_arn = None;
    resolver
}

pub fn same(dev: &Resolver, current: &Resolver) -> bool {
    dev.data_source_name == current.data_source_name
        && dev.request_mapping_template == current.request_mapping_template
        && dev.response_mapping_template == current.response_mapping_template
}

pub fn reconcile(dev: &[Resolver], current: &[Resolver]) -> Vec<Diffed<Resolver>> {
    reconcile_with(
        dev,
        current,
        |d, current| {
            current
                .iter()
                .position(|c| c.type_name == d.type_name && c.field_name == d.field_name)
        },
        same,
    )
}

pub fn diff(dev: &[Resolver], current: &[Resolver]) -> Vec<Diffed<Resolver>> {
    actionable(reconcile(dev, current))
}

pub fn label(resolver: &Resolver) -> String {
    format!("{}.{}", resolver.type_name, resolver.field_name)
}

fn body(resolver: &Resolver, direction: TemplateDirection) -> Result<String, ProvisionerError> {
    let template = resolver.template(direction);
    template.body().map(String::from).ok_or_else(|| {
        ProvisionerError::InvalidState(format!(
            "resolver {}: {direction} template {} was not loaded",
            label(resolver),
            template.file_name().unwrap_or_default()
        ))
    })
}

/// Create and update take the same shape.
pub fn construct_param(resolver: &Resolver) -> Result<ResolverParams, ProvisionerError> {
    Ok(ResolverParams {
        type_name: resolver.type_name.clone(),
        field_name: resolver.field_name.clone(),
        data_source_name: resolver.data_source_name.clone(),
        request_mapping_template: body(resolver, TemplateDirection::Request)?,
        response_mapping_template: body(resolver, TemplateDirection::Response)?,
    })
}
