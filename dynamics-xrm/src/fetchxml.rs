//! Lookup view layouts derived from FetchXML
//!
//! Custom lookup views need a grid layout next to their FetchXML. The layout shows
//! the first few attributes the query selects on its root entity.

use quick_xml::escape::escape;
use uuid::Uuid;

/// How many columns a generated layout shows
pub const MAX_LAYOUT_COLUMNS: usize = 3;

const CELL_WIDTH: u32 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchXmlError {
    /// The document is not well-formed XML
    Parse(String),
    /// No `<entity name="...">` under `<fetch>`
    MissingEntity,
    /// The root entity selects nothing besides its id
    NoAttributes { entity: String },
}

impl std::fmt::Display for FetchXmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchXmlError::Parse(e) => write!(f, "Invalid FetchXML: {}", e),
            FetchXmlError::MissingEntity => {
                write!(f, "FetchXML has no root <entity name=\"...\"> element")
            }
            FetchXmlError::NoAttributes { entity } => write!(
                f,
                "FetchXML selects no attributes on '{}' besides its id",
                entity
            ),
        }
    }
}

impl std::error::Error for FetchXmlError {}

/// Root entity and layout columns pulled out of a FetchXML query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupLayout {
    pub entity_name: String,
    pub columns: Vec<String>,
}

impl LookupLayout {
    /// Primary id attribute by naming convention (`account` → `accountid`)
    pub fn id_attribute(&self) -> String {
        format!("{}id", self.entity_name)
    }

    /// Grid layout XML for the host's custom view API
    pub fn to_layout_xml(&self) -> String {
        let cells: String = self
            .columns
            .iter()
            .map(|column| {
                format!(
                    r#"<cell name="{}" width="{}" />"#,
                    escape(column.as_str()),
                    CELL_WIDTH
                )
            })
            .collect();
        let jump = self.columns.first().map(String::as_str).unwrap_or_default();

        format!(
            r#"<grid name="resultset" object="1" jump="{}" select="1" icon="1" preview="1"><row name="result" id="{}">{}</row></grid>"#,
            escape(jump),
            escape(self.id_attribute()),
            cells
        )
    }
}

/// Extract the root entity and up to three non-id attributes
pub fn lookup_layout(fetch_xml: &str) -> Result<LookupLayout, FetchXmlError> {
    let document =
        roxmltree::Document::parse(fetch_xml).map_err(|e| FetchXmlError::Parse(e.to_string()))?;

    let entity = document
        .root_element()
        .children()
        .find(|node| node.has_tag_name("entity"))
        .ok_or(FetchXmlError::MissingEntity)?;
    let entity_name = entity
        .attribute("name")
        .filter(|name| !name.is_empty())
        .ok_or(FetchXmlError::MissingEntity)?
        .to_string();

    let id_attribute = format!("{}id", entity_name);
    let columns: Vec<String> = entity
        .children()
        .filter(|node| node.has_tag_name("attribute"))
        .filter_map(|node| node.attribute("name"))
        .filter(|name| *name != id_attribute)
        .take(MAX_LAYOUT_COLUMNS)
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        return Err(FetchXmlError::NoAttributes { entity: entity_name });
    }

    log::debug!(
        "Lookup layout for {}: {}",
        entity_name,
        columns.join(", ")
    );

    Ok(LookupLayout {
        entity_name,
        columns,
    })
}

/// Everything the host needs to register a custom lookup view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomView {
    /// Braced GUID identifying the view
    pub view_id: String,
    pub entity_name: String,
    pub view_display_name: String,
    pub fetch_xml: String,
    pub layout_xml: String,
    pub is_default: bool,
}

impl CustomView {
    pub fn new(
        view_display_name: impl Into<String>,
        fetch_xml: impl Into<String>,
    ) -> Result<Self, FetchXmlError> {
        let fetch_xml = fetch_xml.into();
        let layout = lookup_layout(&fetch_xml)?;
        Ok(Self {
            view_id: format!("{{{}}}", Uuid::new_v4().hyphenated().to_string().to_uppercase()),
            layout_xml: layout.to_layout_xml(),
            entity_name: layout.entity_name,
            view_display_name: view_display_name.into(),
            fetch_xml,
            is_default: true,
        })
    }
}
