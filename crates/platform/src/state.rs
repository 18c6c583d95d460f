//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

use std::sync::Arc;

use vigil_core::TaCore;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<TaCore>,
    pub jwt_secret: Arc<String>,
}
