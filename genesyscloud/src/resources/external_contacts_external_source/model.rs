use serde::Deserialize;
use tfcore::{Dynamic, ResourceData};

use crate::api::external_contacts::{ExternalSource, LinkConfiguration};
use crate::resources::{optional_string, single_block};

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalSourceModel {
    pub name: String,
    pub active: bool,
    pub link_configuration: Option<Vec<LinkConfigurationModel>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfigurationModel {
    pub uri_template: String,
}

impl ExternalSourceModel {
    pub fn to_external_source(&self) -> ExternalSource {
        ExternalSource {
            name: Some(self.name.clone()),
            active: Some(self.active),
            link_configuration: self
                .link_configuration
                .as_ref()
                .and_then(|c| c.first())
                .map(|c| LinkConfiguration {
                    uri_template: Some(c.uri_template.clone()),
                }),
            ..ExternalSource::default()
        }
    }
}

pub fn flatten_external_source(source: &ExternalSource, data: &mut ResourceData) {
    data.set_optional_string("name", source.name.clone());
    data.set_optional_bool("active", source.active);
    let link_configuration = match &source.link_configuration {
        Some(config) => single_block(vec![(
            "uri_template",
            optional_string(config.uri_template.as_deref()),
        )]),
        None => Dynamic::List(Vec::new()),
    };
    data.set("link_configuration", link_configuration);
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tfcore::DynamicValue;

    #[test]
    fn link_configuration_is_optional() {
        let model = ExternalSourceModel {
            name: "crm".to_string(),
            active: false,
            link_configuration: None,
        };
        let source = model.to_external_source();
        assert_eq!(source.active, Some(false));
        assert!(source.link_configuration.is_none());
        assert!(source.version.is_none());
    }

    #[test]
    fn flatten_writes_link_block() {
        let source = ExternalSource {
            id: Some("es-1".to_string()),
            name: Some("crm".to_string()),
            active: Some(true),
            link_configuration: Some(LinkConfiguration {
                uri_template: Some("https://crm.example.com/{{externalId}}".to_string()),
            }),
            version: Some(2),
        };

        let mut data = ResourceData::new(DynamicValue::object());
        flatten_external_source(&source, &mut data);

        let link = data.get("link_configuration").unwrap().as_list().unwrap()[0].clone();
        assert_eq!(
            link.as_map().unwrap()["uri_template"],
            Dynamic::String("https://crm.example.com/{{externalId}}".to_string())
        );
        assert_eq!(data.get_bool("active"), Some(true));
    }
}
