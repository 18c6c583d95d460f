//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! HTTP-layer configuration, loaded separately from `vigil_core::Config`
//! since it governs a different concern (the auth/transport surface, not
//! the custody core).

use std::env;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
    pub jwt_secret: String,
}

impl HttpConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        Ok(Self { port, jwt_secret })
    }
}
