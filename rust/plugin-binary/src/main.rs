mod fetch;
mod locator;
mod manifest;
mod render;
mod schema;

use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::{Parser, builder::FalseyValueParser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
    fetch::{ClusterOptions, DocumentSource},
    locator::GroupVersion,
    render::DEFAULT_MAX_DEPTH,
};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Log filter directives, e.g. `CONSOLE_LOG=debug`. Logs go to stderr.
const LOG_ENV_VAR: &str = "CONSOLE_LOG";

/// Walks the OpenAPI v3 schema that the Kubernetes API server publishes for a third-party API
/// and prints a sample YAML of the resource, with the type and default of every `spec` field.
/// Core APIs (Pods, Deployments, ...) are not supported.
#[derive(Parser)]
#[clap(about, author, version)]
struct Opts {
    /// The API group and version, as in the APIVERSION column of `kubectl api-resources`,
    /// e.g. `cert-manager.io/v1`.
    #[arg(long)]
    api: GroupVersion,

    /// The kind of the resource, as in the KIND column of `kubectl api-resources`,
    /// e.g. `Certificate`.
    #[arg(long)]
    kind: String,

    /// The kubeconfig context to use. Ignored with `--in-cluster` or `--schema-file`.
    #[arg(long, env = "KUBECONTEXT")]
    context: Option<String>,

    /// Use the in-cluster service account configuration instead of a kubeconfig.
    #[arg(long, env = "INCLUSTER_CONFIG", value_parser = FalseyValueParser::new())]
    in_cluster: bool,

    /// Do not verify the certificate of the API server.
    #[arg(long)]
    insecure_skip_tls_verify: bool,

    /// Read the OpenAPI v3 document from this file (JSON or YAML) instead of the cluster.
    /// All cluster connection settings are ignored.
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Nesting depth after which nested fields are no longer expanded.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Opts {
    /// The connection flags are also read from the environment, so they are resolved by
    /// precedence instead of rejected as conflicts: a schema file wins over the cluster, and the
    /// in-cluster configuration wins over a kubeconfig context.
    fn document_source(&self) -> DocumentSource {
        if let Some(path) = &self.schema_file {
            return DocumentSource::File(path.clone());
        }

        DocumentSource::Cluster(ClusterOptions {
            context: if self.in_cluster {
                None
            } else {
                self.context.clone()
            },
            in_cluster: self.in_cluster,
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_tracing()?;

    tracing::info!(
        built_info.pkg_version = built_info::PKG_VERSION,
        built_info.git_version = built_info::GIT_VERSION,
        built_info.target = built_info::TARGET,
        built_info.built_time_utc = built_info::BUILT_TIME_UTC,
        built_info.rustc_version = built_info::RUSTC_VERSION,
        "Starting {description}",
        description = built_info::PKG_DESCRIPTION
    );

    let document = opts.document_source().load(&opts.api).await?;
    let spec_fields = locator::locate_spec_fields(&document, &opts.api, &opts.kind)?;
    let skeleton = manifest::build_skeleton(&opts.api, &opts.kind, spec_fields, opts.max_depth);

    std::io::stdout()
        .lock()
        .write_all(skeleton.as_bytes())
        .context("failed to write the skeleton to stdout")?;

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env()
        .with_context(|| format!("invalid log filter in {LOG_ENV_VAR}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
