//! Obtains the OpenAPI v3 document of a group/version, either from the cluster or from a file.
use std::path::{Path, PathBuf};

use kube::{
    Client, Config,
    config::{InClusterError, KubeConfigOptions, KubeconfigError},
};
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::locator::GroupVersion;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("failed to load the kubeconfig"))]
    LoadKubeconfig { source: KubeconfigError },

    #[snafu(display("failed to load the in-cluster configuration"))]
    LoadInClusterConfig { source: InClusterError },

    #[snafu(display("failed to create the Kubernetes client"))]
    CreateClient { source: kube::Error },

    #[snafu(display("failed to build the request for {path}"))]
    BuildRequest { source: http::Error, path: String },

    #[snafu(display("failed to fetch the OpenAPI document from {path}"))]
    FetchDocument { source: kube::Error, path: String },

    #[snafu(display("failed to read the OpenAPI document {}", path.display()))]
    ReadSchemaFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse {} as JSON", path.display()))]
    ParseJsonSchemaFile {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse {} as YAML", path.display()))]
    ParseYamlSchemaFile {
        source: serde_yaml::Error,
        path: PathBuf,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// How to reach the API server.
#[derive(Clone, Debug, Default)]
pub struct ClusterOptions {
    /// Kubeconfig context to use instead of the current one.
    pub context: Option<String>,
    /// Use the service account of the pod we are running in instead of a kubeconfig.
    pub in_cluster: bool,
    pub insecure_skip_tls_verify: bool,
}

/// Where the OpenAPI document comes from.
#[derive(Clone, Debug)]
pub enum DocumentSource {
    Cluster(ClusterOptions),
    File(PathBuf),
}

impl DocumentSource {
    pub async fn load(&self, group_version: &GroupVersion) -> Result<Value> {
        match self {
            DocumentSource::Cluster(options) => {
                let client = create_client(options).await?;
                fetch_openapi_document(&client, group_version).await
            }
            DocumentSource::File(path) => load_openapi_document(path),
        }
    }
}

pub async fn create_client(options: &ClusterOptions) -> Result<Client> {
    let mut config = if options.in_cluster {
        Config::incluster().context(LoadInClusterConfigSnafu)?
    } else {
        Config::from_kubeconfig(&KubeConfigOptions {
            context: options.context.clone(),
            ..KubeConfigOptions::default()
        })
        .await
        .context(LoadKubeconfigSnafu)?
    };

    if options.insecure_skip_tls_verify {
        config.accept_invalid_certs = true;
    }
    debug!(cluster_url = %config.cluster_url, "connecting to API server");

    Client::try_from(config).context(CreateClientSnafu)
}

/// Issues the equivalent of `kubectl get --raw /openapi/v3/apis/<group>/<version>`.
pub async fn fetch_openapi_document(
    client: &Client,
    group_version: &GroupVersion,
) -> Result<Value> {
    let path = group_version.openapi_path();
    let request = http::Request::get(&path)
        .header(http::header::ACCEPT, "application/json")
        .body(Vec::new())
        .with_context(|_| BuildRequestSnafu { path: path.clone() })?;

    debug!(%path, "fetching OpenAPI document");
    client
        .request::<Value>(request)
        .await
        .context(FetchDocumentSnafu { path })
}

/// Reads an OpenAPI document from disk, as JSON if the file is named `*.json` and as YAML
/// otherwise (which also accepts JSON).
pub fn load_openapi_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).context(ReadSchemaFileSnafu { path })?;

    debug!(path = %path.display(), "loading OpenAPI document from file");
    if path.extension().is_some_and(|extension| extension == "json") {
        serde_json::from_str(&content).context(ParseJsonSchemaFileSnafu { path })
    } else {
        serde_yaml::from_str(&content).context(ParseYamlSchemaFileSnafu { path })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;
    use serde_json::json;

    use super::*;

    fn schema_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("failed to create temporary file");
        file.write_all(content.as_bytes())
            .expect("failed to write temporary file");
        file
    }

    #[test]
    fn test_load_json_document() {
        let file = schema_file(
            ".json",
            r#"{"components": {"schemas": {"b": {"type": "string"}, "a": {"type": "integer"}}}}"#,
        );
        let document = load_openapi_document(file.path()).unwrap();

        let names: Vec<_> = document["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_load_yaml_document() {
        let file = schema_file(
            ".yaml",
            indoc! {"
                components:
                  schemas:
                    io.example.v1.Widget:
                      type: object
                      properties:
                        spec:
                          type: object
                          properties:
                            zeta:
                              type: boolean
                              default: true
                            alpha:
                              type: integer
            "},
        );
        let document = load_openapi_document(file.path()).unwrap();

        assert_eq!(
            document.pointer("/components/schemas/io.example.v1.Widget/properties/spec/properties"),
            Some(&json!({
                "zeta": {"type": "boolean", "default": true},
                "alpha": {"type": "integer"}
            }))
        );
        let names: Vec<_> = document
            .pointer("/components/schemas/io.example.v1.Widget/properties/spec/properties")
            .and_then(Value::as_object)
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_json_without_json_extension_is_read_as_yaml() {
        let file = schema_file(".txt", r#"{"openapi": "3.0.0"}"#);
        let document = load_openapi_document(file.path()).unwrap();

        assert_eq!(document, json!({"openapi": "3.0.0"}));
    }

    #[test]
    fn test_invalid_json_document() {
        let file = schema_file(".json", "components: {}");

        assert!(matches!(
            load_openapi_document(file.path()),
            Err(Error::ParseJsonSchemaFile { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml_document() {
        let file = schema_file(".yaml", "components: [unclosed");

        assert!(matches!(
            load_openapi_document(file.path()),
            Err(Error::ParseYamlSchemaFile { .. })
        ));
    }

    #[test]
    fn test_missing_document() {
        let directory = tempfile::tempdir().expect("failed to create temporary directory");
        let path = directory.path().join("missing.json");

        assert!(matches!(
            load_openapi_document(&path),
            Err(Error::ReadSchemaFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_source_ignores_group_version() {
        let file = schema_file(".json", r#"{"openapi": "3.0.0"}"#);
        let source = DocumentSource::File(file.path().to_owned());
        let group_version = "example.io/v1".parse().unwrap();

        assert_eq!(
            source.load(&group_version).await.unwrap(),
            json!({"openapi": "3.0.0"})
        );
    }
}
