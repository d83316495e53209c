//! Finds the schema of a kind inside the OpenAPI v3 document the API server publishes for its
//! group/version.
use std::{fmt, str::FromStr};

use serde_json::Value;
use snafu::{OptionExt, Snafu, ensure};
use tracing::debug;

use crate::schema::{Fields, SchemaNode};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display(
        "{input:?} is not of the form <group>/<version>, core API kinds are not supported"
    ))]
    CoreGroupNotSupported { input: String },

    #[snafu(display("{input:?} is missing the {part} part of <group>/<version>"))]
    EmptyGroupVersionPart { input: String, part: &'static str },

    #[snafu(display("the OpenAPI document has no components.schemas section"))]
    MissingSchemas,

    #[snafu(display("object {kind} not found in {group_version}"))]
    KindNotFound {
        kind: String,
        group_version: GroupVersion,
    },

    #[snafu(display(
        "the requested object {kind} does not have a spec section in the registered API"
    ))]
    MissingSpec { kind: String },

    #[snafu(display("the spec section of {kind} does not declare any properties"))]
    SpecWithoutProperties { kind: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// An API group and version of a non-core API, such as `cert-manager.io/v1`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl FromStr for GroupVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let (group, version) = input
            .split_once('/')
            .context(CoreGroupNotSupportedSnafu { input })?;
        ensure!(
            !group.is_empty(),
            EmptyGroupVersionPartSnafu {
                input,
                part: "group"
            }
        );
        ensure!(
            !version.is_empty(),
            EmptyGroupVersionPartSnafu {
                input,
                part: "version"
            }
        );

        Ok(Self {
            group: group.to_owned(),
            version: version.to_owned(),
        })
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.version)
    }
}

impl GroupVersion {
    /// Path of the OpenAPI v3 document that covers this group/version.
    pub fn openapi_path(&self) -> String {
        format!("/openapi/v3/apis/{}/{}", self.group, self.version)
    }

    /// Key of `kind` below `components.schemas`.
    ///
    /// The API server names schemas after the reversed group, e.g. `cert-manager.io/v1` and
    /// `Certificate` becomes `io.cert-manager.v1.Certificate`.
    pub fn schema_key(&self, kind: &str) -> String {
        let reversed_group = self.group.rsplit('.').collect::<Vec<_>>().join(".");
        format!("{reversed_group}.{}.{kind}", self.version)
    }
}

/// Returns the `spec.properties` mapping of `kind`, the input of the skeleton renderer.
pub fn locate_spec_fields<'a>(
    document: &'a Value,
    group_version: &GroupVersion,
    kind: &str,
) -> Result<&'a Fields> {
    let schemas = document
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .context(MissingSchemasSnafu)?;

    let key = group_version.schema_key(kind);
    debug!(schema_key = %key, "looking up kind schema");
    let kind_schema = schemas
        .get(&key)
        .and_then(SchemaNode::from_value)
        .with_context(|| KindNotFoundSnafu {
            kind,
            group_version: group_version.clone(),
        })?;

    let spec = kind_schema
        .properties()
        .and_then(|properties| properties.get("spec"))
        .and_then(SchemaNode::from_value)
        .context(MissingSpecSnafu { kind })?;

    spec.properties()
        .context(SpecWithoutPropertiesSnafu { kind })
}
