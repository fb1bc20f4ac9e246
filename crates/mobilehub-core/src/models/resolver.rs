use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placeholder::MappingTemplate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolver {
    pub type_name: String,
    pub field_name: String,
    pub data_source_name: String,
    pub request_mapping_template: MappingTemplate,
    pub response_mapping_template: MappingTemplate,

    // ── provider-only ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver_arn: Option<String>,
}

impl Resolver {
    pub fn template(&self, direction: TemplateDirection) -> &MappingTemplate {
        match direction {
            TemplateDirection::Request => &self.request_mapping_template,
            TemplateDirection::Response => &self.response_mapping_template,
        }
    }

    pub fn template_mut(&mut self, direction: TemplateDirection) -> &mut MappingTemplate {
        match direction {
            TemplateDirection::Request => &mut self.request_mapping_template,
            TemplateDirection::Response => &mut self.response_mapping_template,
        }
    }

    /// File name for an out-of-line template body, e.g. `Query.getPost.request`.
    pub fn template_file_name(&self, direction: TemplateDirection) -> String {
        format!("{}.{}.{}", self.type_name, self.field_name, direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateDirection {
    Request,
    Response,
}

impl TemplateDirection {
    pub const ALL: [Self; 2] = [Self::Request, Self::Response];
}

impl fmt::Display for TemplateDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}
