//! Route policy: the single table declaring who may call each operation.
//!
//! Every route is registered through [`crate::middleware::PolicyGuard::protect`]
//! with one of these operation ids; a route without an entry fails router
//! construction.

use declarant_auth::{OperationId, PolicyError, PolicyTable, Role};

pub mod ops {
    use declarant_auth::OperationId;

    pub const HEALTH: OperationId = OperationId::new("system.health");
    pub const LOGIN: OperationId = OperationId::new("auth.login");
    pub const REGISTER: OperationId = OperationId::new("auth.register");
    pub const CHECK_STATUS: OperationId = OperationId::new("auth.check_status");
    pub const USERS_READ: OperationId = OperationId::new("users.read");
    pub const USERS_DEACTIVATE: OperationId = OperationId::new("users.deactivate");
    pub const USERS_ACTIVATE: OperationId = OperationId::new("users.activate");
    pub const USERS_UPDATE_ROLE: OperationId = OperationId::new("users.update_role");
}

pub const ALL_OPERATIONS: [OperationId; 8] = [
    ops::HEALTH,
    ops::LOGIN,
    ops::REGISTER,
    ops::CHECK_STATUS,
    ops::USERS_READ,
    ops::USERS_DEACTIVATE,
    ops::USERS_ACTIVATE,
    ops::USERS_UPDATE_ROLE,
];

pub fn policy_table() -> Result<PolicyTable, PolicyError> {
    PolicyTable::builder()
        .public(ops::HEALTH)
        .public(ops::LOGIN)
        .require(ops::REGISTER, [Role::Admin])
        .authenticated(ops::CHECK_STATUS)
        .require(ops::USERS_READ, [Role::Admin])
        .require(ops::USERS_DEACTIVATE, [Role::Admin])
        .require(ops::USERS_ACTIVATE, [Role::Admin])
        .require(ops::USERS_UPDATE_ROLE, [Role::Admin])
        .build()
}
