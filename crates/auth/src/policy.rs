//! Policy Engine: per-operation role requirements and their evaluation.
//!
//! Requirements are declared once, in a [`PolicyTable`] built at startup, and
//! evaluated per request against an already authenticated principal.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use declarant_core::PrincipalId;

use crate::{Principal, Role};

/// Access requirement attached to an operation.
///
/// `Public` and `AuthenticatedAny` are distinct states: the former skips
/// authentication altogether, the latter demands it but constrains no role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "roles", rename_all = "snake_case")]
pub enum RoleRequirement {
    Public,
    AuthenticatedAny,
    Roles(BTreeSet<Role>),
}

impl RoleRequirement {
    /// Requirement for the given roles; an empty set means `AuthenticatedAny`.
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            RoleRequirement::AuthenticatedAny
        } else {
            RoleRequirement::Roles(roles)
        }
    }

    pub fn requires_authentication(&self) -> bool {
        !matches!(self, RoleRequirement::Public)
    }
}

impl core::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RoleRequirement::Public => f.write_str("public"),
            RoleRequirement::AuthenticatedAny => f.write_str("any authenticated principal"),
            RoleRequirement::Roles(roles) => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user {name} ({principal_id}) does not have the required role: {required}")]
    RoleMismatch {
        principal_id: PrincipalId,
        name: String,
        role: Role,
        required: String,
    },
}

/// Authorize an authenticated principal against a requirement.
///
/// - No IO
/// - No panics
/// - Same inputs, same outcome
pub fn authorize(principal: &Principal, requirement: &RoleRequirement) -> Result<(), AuthzError> {
    match requirement {
        RoleRequirement::Public | RoleRequirement::AuthenticatedAny => Ok(()),
        RoleRequirement::Roles(roles) if roles.contains(&principal.role) => Ok(()),
        RoleRequirement::Roles(_) => Err(AuthzError::RoleMismatch {
            principal_id: principal.id,
            name: principal.full_name.clone(),
            role: principal.role,
            required: requirement.to_string(),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy table
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a protected operation (e.g. `"auth.register"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OperationId(&'static str);

impl OperationId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for OperationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("operation '{0}' registered more than once")]
    Duplicate(OperationId),

    #[error("operation '{0}' has no registered requirement")]
    Unregistered(OperationId),
}

/// Static mapping from operation to requirement.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: BTreeMap<OperationId, RoleRequirement>,
}

impl PolicyTable {
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// Look up an operation. Unknown operations are an error, never an implicit allow.
    pub fn requirement(&self, operation: OperationId) -> Result<&RoleRequirement, PolicyError> {
        self.entries
            .get(&operation)
            .ok_or(PolicyError::Unregistered(operation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    entries: BTreeMap<OperationId, RoleRequirement>,
    duplicate: Option<OperationId>,
}

impl PolicyTableBuilder {
    pub fn public(self, operation: OperationId) -> Self {
        self.declare(operation, RoleRequirement::Public)
    }

    pub fn authenticated(self, operation: OperationId) -> Self {
        self.declare(operation, RoleRequirement::AuthenticatedAny)
    }

    pub fn require(self, operation: OperationId, roles: impl IntoIterator<Item = Role>) -> Self {
        self.declare(operation, RoleRequirement::roles(roles))
    }

    pub fn declare(mut self, operation: OperationId, requirement: RoleRequirement) -> Self {
        if self.entries.insert(operation, requirement).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(operation);
        }
        self
    }

    pub fn build(self) -> Result<PolicyTable, PolicyError> {
        if let Some(operation) = self.duplicate {
            return Err(PolicyError::Duplicate(operation));
        }
        Ok(PolicyTable {
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    const READ: OperationId = OperationId::new("things.read");
    const WRITE: OperationId = OperationId::new("things.write");
    const HEALTH: OperationId = OperationId::new("system.health");

    fn principal(role: Role) -> Principal {
        Principal {
            id: PrincipalId::new(),
            full_name: "Juan Pérez".to_string(),
            document_number: "12345678".to_string(),
            email: None,
            phone_number: None,
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::User), Just(Role::Admin)]
    }

    #[test]
    fn admin_requirement_denies_standard_user() {
        let requirement = RoleRequirement::roles([Role::Admin]);
        let user = principal(Role::User);

        let err = authorize(&user, &requirement).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Juan Pérez"), "{message}");
        assert!(message.contains("admin"), "{message}");
        assert!(!message.contains("12345678"), "{message}");

        assert_eq!(authorize(&principal(Role::Admin), &requirement), Ok(()));
    }

    #[test]
    fn empty_role_list_normalises_to_authenticated_any() {
        assert_eq!(RoleRequirement::roles(Vec::<Role>::new()), RoleRequirement::AuthenticatedAny);
        assert!(RoleRequirement::AuthenticatedAny.requires_authentication());
        assert!(!RoleRequirement::Public.requires_authentication());
        assert!(RoleRequirement::roles([Role::User]).requires_authentication());
    }

    #[test]
    fn requirement_display_lists_roles_in_order() {
        let req = RoleRequirement::roles([Role::Admin, Role::User, Role::Admin]);
        assert_eq!(req.to_string(), "user, admin");
    }

    #[test]
    fn table_keeps_three_way_distinction() {
        let table = PolicyTable::builder()
            .public(HEALTH)
            .authenticated(READ)
            .require(WRITE, [Role::Admin])
            .build()
            .unwrap();

        assert_eq!(table.requirement(HEALTH), Ok(&RoleRequirement::Public));
        assert_eq!(table.requirement(READ), Ok(&RoleRequirement::AuthenticatedAny));
        assert_eq!(
            table.requirement(WRITE),
            Ok(&RoleRequirement::Roles(BTreeSet::from([Role::Admin])))
        );
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let table = PolicyTable::builder().public(HEALTH).build().unwrap();
        assert_eq!(table.requirement(WRITE), Err(PolicyError::Unregistered(WRITE)));
    }

    #[test]
    fn duplicate_registration_fails_the_build() {
        let err = PolicyTable::builder()
            .public(READ)
            .require(READ, [Role::Admin])
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::Duplicate(READ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn authenticated_any_allows_every_role(role in any_role()) {
            prop_assert!(authorize(&principal(role), &RoleRequirement::AuthenticatedAny).is_ok());
            prop_assert!(authorize(&principal(role), &RoleRequirement::roles(Vec::<Role>::new())).is_ok());
        }

        #[test]
        fn admin_only_allows_exactly_admins(role in any_role()) {
            let allowed = authorize(&principal(role), &RoleRequirement::roles([Role::Admin])).is_ok();
            prop_assert_eq!(allowed, role == Role::Admin);
        }

        #[test]
        fn decision_is_membership_and_idempotent(
            role in any_role(),
            required in proptest::collection::vec(any_role(), 0..4),
        ) {
            let p = principal(role);
            let requirement = RoleRequirement::roles(required.clone());

            let first = authorize(&p, &requirement);
            let second = authorize(&p, &requirement);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.is_ok(), required.is_empty() || required.contains(&role));
        }
    }
}
