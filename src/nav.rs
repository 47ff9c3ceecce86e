//! Role-filtered navigation links

use serde::Serialize;

use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

const fn link(label: &'static str, path: &'static str) -> NavLink {
    NavLink { label, path }
}

pub const ALL_LINKS: [NavLink; 10] = [
    link("Home", "/"),
    link("Cases", "/cases"),
    link("Documents", "/documents"),
    link("Clients", "/clients"),
    link("Tasks", "/tasks"),
    link("Users", "/users"),
    link("Reports", "/reports"),
    link("Case Archive", "/case-archive"),
    link("Payments", "/payments"),
    link("Activity Logs", "/user-logs"),
];

/// Links visible to `role`, in menu order. Unknown roles see nothing.
pub fn links_for(role: Option<&Role>) -> Vec<NavLink> {
    let visible: fn(&NavLink) -> bool = match role {
        Some(Role::Admin) => |_| true,
        Some(Role::Lawyer) => |l| !matches!(l.label, "Users" | "Reports"),
        Some(Role::Staff) => {
            |l| matches!(l.label, "Home" | "Documents" | "Clients" | "Tasks" | "Activity Logs")
        }
        Some(Role::Paralegal) => |l| matches!(l.label, "Home" | "Documents" | "Tasks" | "Activity Logs"),
        _ => |_| false,
    };
    ALL_LINKS.iter().copied().filter(|l| visible(l)).collect()
}
