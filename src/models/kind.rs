//! Entity kinds managed by the store
//!
//! Every table the backup subsystem exports and restores is described here
//! once: its snapshot key, its foreign keys and the fields a record must
//! carry. Export, deletion and insertion all iterate this registry.

use serde::{Deserialize, Serialize};

/// Field holding the password hash on account records
pub const CREDENTIAL_FIELD: &str = "password";

/// Primary key field shared by every kind
pub const ID_FIELD: &str = "id";

/// Field activity logs are ordered by
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A reference from a record field to the `id` of a parent kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    pub parent: EntityKind,
    pub optional: bool,
}

const fn required(field: &'static str, parent: EntityKind) -> ForeignKey {
    ForeignKey {
        field,
        parent,
        optional: false,
    }
}

const fn optional(field: &'static str, parent: EntityKind) -> ForeignKey {
    ForeignKey {
        field,
        parent,
        optional: true,
    }
}

/// The eleven record kinds of the Ortomat data store
///
/// Declaration order is the insertion order: every kind comes after the
/// kinds it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Accounts,
    Machines,
    Products,
    Cells,
    DoctorMachines,
    CourierMachines,
    InviteTokens,
    Payments,
    Sales,
    ActivityLogs,
    Settings,
}

impl EntityKind {
    /// Parents before children
    pub const INSERT_ORDER: [EntityKind; 11] = [
        EntityKind::Accounts,
        EntityKind::Machines,
        EntityKind::Products,
        EntityKind::Cells,
        EntityKind::DoctorMachines,
        EntityKind::CourierMachines,
        EntityKind::InviteTokens,
        EntityKind::Payments,
        EntityKind::Sales,
        EntityKind::ActivityLogs,
        EntityKind::Settings,
    ];

    /// Children before parents
    pub const DELETE_ORDER: [EntityKind; 11] = [
        EntityKind::ActivityLogs,
        EntityKind::Sales,
        EntityKind::Payments,
        EntityKind::Cells,
        EntityKind::InviteTokens,
        EntityKind::CourierMachines,
        EntityKind::DoctorMachines,
        EntityKind::Products,
        EntityKind::Machines,
        EntityKind::Settings,
        EntityKind::Accounts,
    ];

    /// Every kind, in insertion order
    pub fn all() -> &'static [EntityKind] {
        &Self::INSERT_ORDER
    }

    /// Key used for this kind in snapshot documents and table file names
    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Accounts => "accounts",
            EntityKind::Machines => "machines",
            EntityKind::Products => "products",
            EntityKind::Cells => "cells",
            EntityKind::DoctorMachines => "doctorMachines",
            EntityKind::CourierMachines => "courierMachines",
            EntityKind::InviteTokens => "inviteTokens",
            EntityKind::Payments => "payments",
            EntityKind::Sales => "sales",
            EntityKind::ActivityLogs => "activityLogs",
            EntityKind::Settings => "settings",
        }
    }

    /// Look a kind up by its snapshot key
    pub fn from_key(key: &str) -> Option<EntityKind> {
        Self::all().iter().copied().find(|kind| kind.key() == key)
    }

    /// Human-readable name for status output
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Accounts => "Accounts",
            EntityKind::Machines => "Machines",
            EntityKind::Products => "Products",
            EntityKind::Cells => "Cells",
            EntityKind::DoctorMachines => "Doctor-machine links",
            EntityKind::CourierMachines => "Courier-machine links",
            EntityKind::InviteTokens => "Invite tokens",
            EntityKind::Payments => "Payments",
            EntityKind::Sales => "Sales",
            EntityKind::ActivityLogs => "Activity logs",
            EntityKind::Settings => "Settings",
        }
    }

    /// Foreign keys declared on records of this kind
    pub fn foreign_keys(self) -> &'static [ForeignKey] {
        use EntityKind::*;

        const CELLS: &[ForeignKey] = &[required("machineId", Machines), optional("productId", Products)];
        const DOCTOR_MACHINES: &[ForeignKey] =
            &[required("doctorId", Accounts), required("machineId", Machines)];
        const COURIER_MACHINES: &[ForeignKey] =
            &[required("courierId", Accounts), required("machineId", Machines)];
        const INVITE_TOKENS: &[ForeignKey] =
            &[optional("createdById", Accounts), optional("machineId", Machines)];
        const PAYMENTS: &[ForeignKey] = &[
            optional("machineId", Machines),
            optional("cellId", Cells),
            optional("productId", Products),
        ];
        const SALES: &[ForeignKey] = &[
            optional("paymentId", Payments),
            optional("machineId", Machines),
            optional("cellId", Cells),
            optional("productId", Products),
            optional("doctorId", Accounts),
        ];
        const ACTIVITY_LOGS: &[ForeignKey] = &[optional("userId", Accounts)];

        match self {
            Cells => CELLS,
            DoctorMachines => DOCTOR_MACHINES,
            CourierMachines => COURIER_MACHINES,
            InviteTokens => INVITE_TOKENS,
            Payments => PAYMENTS,
            Sales => SALES,
            ActivityLogs => ACTIVITY_LOGS,
            Accounts | Machines | Products | Settings => &[],
        }
    }

    /// Fields (besides `id` and required foreign keys) a record must carry
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Accounts => &["email", "role"],
            _ => &[],
        }
    }

    /// Whether the table holds at most one record
    pub fn is_singleton(self) -> bool {
        self == EntityKind::Settings
    }

    /// Kinds whose records reference this kind, with the referencing field
    pub fn dependents(self) -> impl Iterator<Item = (EntityKind, &'static ForeignKey)> {
        Self::all().iter().flat_map(move |&child| {
            child
                .foreign_keys()
                .iter()
                .filter(move |fk| fk.parent == self)
                .map(move |fk| (child, fk))
        })
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
