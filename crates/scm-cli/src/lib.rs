//! scm - source component manager
//!
//! Install, publish, and fork UI component source files from a
//! GitHub-hosted registry. Components are plain files copied into the
//! consuming project, not opaque packages.
//!
//! # Overview
//!
//! - `scm add acme/button` copies a published component (and its
//!   registry dependencies) into the current project.
//! - `scm publish` fingerprints a component directory, computes the
//!   version bump, and opens a release pull request.
//! - Vendor-owned primitive names are reserved: creating or forking to
//!   one is rejected, and depending on one redirects to the vendor's
//!   own installer.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GitHub account that owns the registry repository.
pub const REGISTRY_OWNER: &str = "scm-registry";

/// Registry repository name.
pub const REGISTRY_REPO: &str = "components";

/// OAuth app client id used for the device-flow login.
pub const OAUTH_CLIENT_ID: &str = "Ov23liScmCliRegistry";

#[derive(Debug, Parser)]
#[command(name = "scm")]
#[command(author, version, about = "scm - source component manager")]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in to GitHub via the device flow
    Login,
    /// Forget stored credentials
    Logout,
    /// Scaffold a new component in the current directory
    Create {
        /// Component name (lowercase, hyphenated)
        name: String,
    },
    /// Install components into the current project
    Add {
        /// Component spec(s): namespace/name or namespace/name@1.2.0
        #[arg(required = true)]
        components: Vec<String>,
        /// Install only the named components, not their dependencies
        #[arg(long)]
        skip_deps: bool,
        /// Bypass the metadata cache
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Publish a component directory as a new version
    Publish {
        /// Component directory (defaults to the current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Release this exact version instead of the computed bump
        #[arg(long)]
        version: Option<String>,
    },
    /// Update installed components to their latest versions
    Update {
        /// Single component to update (namespace/name); all when omitted
        component: Option<String>,
    },
    /// Search published components
    Search {
        /// Keyword matched against names, descriptions, and categories
        keyword: String,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a component's metadata and README without installing it
    Preview {
        /// Component spec: namespace/name[@version]
        component: String,
    },
    /// Copy a published component into a locally-owned editable fork
    Fork {
        /// Component spec to fork: namespace/name[@version]
        component: String,
        /// Name for the fork (same rules as `create`)
        new_name: String,
    },
}
