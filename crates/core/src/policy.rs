//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Priority-to-threshold policy: higher urgency needs fewer peers to
//! reconstruct, trading compromise resistance for a faster emergency read.

use vigil_types::Priority;

use crate::error::{CoreError, CoreResult};

pub fn priority_to_threshold(priority: Priority) -> CoreResult<u8> {
    match priority {
        Priority::High => Ok(2),
        Priority::Medium => Ok(3),
        Priority::Low => Ok(4),
    }
}
