//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Minimal bearer-token auth for the ambient HTTP surface. The user table
//! is a static configuration-provided mapping, not a database — identity
//! management is an external collaborator's concern.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Hospital,
    Doctor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

struct User {
    username: &'static str,
    password: &'static str,
    role: Role,
}

const USERS: &[User] = &[
    User {
        username: "hospital1",
        password: "hospital1",
        role: Role::Hospital,
    },
    User {
        username: "doctor1",
        password: "doctor1",
        role: Role::Doctor,
    },
];

pub fn authenticate(username: &str, password: &str) -> Option<Role> {
    USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .map(|u| u.role)
}

pub fn mint_token(username: &str, role: Role, secret: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        role,
        exp: (Utc::now() + Duration::hours(8)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Into::into)
}

pub fn verify_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticates_known_users() {
        assert!(authenticate("hospital1", "hospital1").is_some());
        assert!(authenticate("doctor1", "doctor1").is_some());
        assert!(authenticate("doctor1", "wrong").is_none());
        assert!(authenticate("ghost", "ghost").is_none());
    }

    #[test]
    fn mint_and_verify_round_trip() {
        let token = mint_token("doctor1", Role::Doctor, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "doctor1");
        assert_eq!(claims.role, Role::Doctor);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = mint_token("doctor1", Role::Doctor, "test-secret").unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
