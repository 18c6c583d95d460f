//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! vigil-platform — the ambient HTTP surface wiring `vigil-core`'s trusted
//! authority to the outside world: bearer-token auth, request routing, and
//! process configuration.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::HttpConfig;
pub use router::create_router;
pub use state::AppState;
