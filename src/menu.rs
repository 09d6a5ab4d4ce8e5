//! Navigation menus, one declarative table per role.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{identity::CurrentUser, models::UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Customer,
    Admin,
}

impl Role {
    pub fn of(user: Option<&CurrentUser>) -> Self {
        user.map_or(Role::Guest, |u| u.role.into())
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Customer => Role::Customer,
            UserRole::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuItem {
    pub label: String,
    pub icon: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntry {
    Section {
        label: String,
        icon: Option<String>,
        items: Vec<MenuItem>,
    },
    Separator,
}

enum EntrySpec {
    Section {
        label: &'static str,
        icon: Option<&'static str>,
        items: &'static [(&'static str, &'static str, &'static str)],
    },
    Separator,
}

const ACCOUNT: EntrySpec = EntrySpec::Section {
    label: "Account",
    icon: Some("pi pi-fw pi-user"),
    items: &[
        ("Profile", "pi pi-fw pi-user-edit", "/pages/profile"),
        ("Settings", "pi pi-fw pi-cog", "/pages/settings"),
    ],
};

const GUEST_MENU: &[EntrySpec] = &[EntrySpec::Section {
    label: "Welcome",
    icon: None,
    items: &[
        ("Home", "pi pi-fw pi-home", "/landing"),
        ("Sign In", "pi pi-fw pi-sign-in", "/auth/login"),
        ("Sign Up", "pi pi-fw pi-user-plus", "/auth/signup"),
    ],
}];

const CUSTOMER_MENU: &[EntrySpec] = &[
    EntrySpec::Section {
        label: "Dashboard",
        icon: None,
        items: &[("Overview", "pi pi-fw pi-home", "/dashboard")],
    },
    EntrySpec::Section {
        label: "Orders",
        icon: Some("pi pi-fw pi-file"),
        items: &[
            ("New Order", "pi pi-fw pi-plus-circle", "/pages/orders/new"),
            ("My Orders", "pi pi-fw pi-list", "/pages/orders/list"),
            ("Order History", "pi pi-fw pi-history", "/pages/orders/history"),
        ],
    },
    EntrySpec::Section {
        label: "Payments",
        icon: Some("pi pi-fw pi-wallet"),
        items: &[
            ("Pending Payments", "pi pi-fw pi-clock", "/pages/payments/pending"),
            ("Payment History", "pi pi-fw pi-credit-card", "/pages/payments/history"),
        ],
    },
    EntrySpec::Section {
        label: "Services",
        icon: Some("pi pi-fw pi-box"),
        items: &[
            ("View Services", "pi pi-fw pi-eye", "/pages/services/view"),
            ("Pricing", "pi pi-fw pi-dollar", "/pages/services/pricing"),
        ],
    },
    EntrySpec::Separator,
    ACCOUNT,
];

const ADMIN_MENU: &[EntrySpec] = &[
    EntrySpec::Section {
        label: "Dashboard",
        icon: None,
        items: &[
            ("Statistics", "pi pi-fw pi-chart-bar", "/dashboard"),
            ("Today's Orders", "pi pi-fw pi-calendar-clock", "/dashboard/today"),
        ],
    },
    EntrySpec::Section {
        label: "Order Management",
        icon: Some("pi pi-fw pi-file"),
        items: &[
            ("All Orders", "pi pi-fw pi-list", "/admin/orders/all"),
            ("Pending Orders", "pi pi-fw pi-clock", "/admin/orders/pending"),
            ("In Progress", "pi pi-fw pi-spin pi-spinner", "/admin/orders/progress"),
            ("Completed", "pi pi-fw pi-check-circle", "/admin/orders/completed"),
        ],
    },
    EntrySpec::Section {
        label: "Service Management",
        icon: Some("pi pi-fw pi-box"),
        items: &[
            ("Services List", "pi pi-fw pi-list", "/admin/services/list"),
            ("Add Service", "pi pi-fw pi-plus", "/admin/services/add"),
            ("Edit Pricing", "pi pi-fw pi-dollar", "/admin/services/pricing"),
        ],
    },
    EntrySpec::Section {
        label: "Payment Management",
        icon: Some("pi pi-fw pi-wallet"),
        items: &[
            ("Pending Verification", "pi pi-fw pi-exclamation-circle", "/admin/payments/pending"),
            ("Verified Payments", "pi pi-fw pi-check", "/admin/payments/verified"),
            ("Payment History", "pi pi-fw pi-history", "/admin/payments/history"),
        ],
    },
    EntrySpec::Section {
        label: "User Management",
        icon: Some("pi pi-fw pi-users"),
        items: &[
            ("All Users", "pi pi-fw pi-users", "/admin/users/all"),
            ("Customer List", "pi pi-fw pi-user", "/admin/users/customers"),
        ],
    },
    EntrySpec::Section {
        label: "Reports",
        icon: Some("pi pi-fw pi-chart-line"),
        items: &[
            ("Sales Report", "pi pi-fw pi-chart-bar", "/admin/reports/sales"),
            ("Order Analytics", "pi pi-fw pi-chart-pie", "/admin/reports/analytics"),
        ],
    },
    EntrySpec::Separator,
    ACCOUNT,
];

fn table(role: Role) -> &'static [EntrySpec] {
    match role {
        Role::Guest => GUEST_MENU,
        Role::Customer => CUSTOMER_MENU,
        Role::Admin => ADMIN_MENU,
    }
}

pub fn menu_for(role: Role) -> Vec<MenuEntry> {
    table(role)
        .iter()
        .map(|entry| match entry {
            EntrySpec::Section { label, icon, items } => MenuEntry::Section {
                label: label.to_string(),
                icon: icon.map(str::to_string),
                items: items
                    .iter()
                    .map(|(label, icon, route)| MenuItem {
                        label: label.to_string(),
                        icon: icon.to_string(),
                        route: route.to_string(),
                    })
                    .collect(),
            },
            EntrySpec::Separator => MenuEntry::Separator,
        })
        .collect()
}
