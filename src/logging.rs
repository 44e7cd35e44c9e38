// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays parseable. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let default = if verbose { "kakeibo=debug" } else { "kakeibo=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
