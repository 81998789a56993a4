// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-keyed navigation.
//!
//! Each role has its own menu; routes outside a role's menu are rejected by
//! [`Route::allowed_for`] before any role-gated request is made.

use crate::models::Role;

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Home,
    Pets,
    BookAppointment,
    ApplyAsDoctor,
    AppointmentRequests,
    Profile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Home => "/dashboard",
            Route::Pets => "/dashboard/pets",
            Route::BookAppointment => "/dashboard/book-appointment",
            Route::ApplyAsDoctor => "/dashboard/apply",
            Route::AppointmentRequests => "/dashboard/appointment-requests",
            Route::Profile => "/dashboard/profile",
        }
    }

    /// Public routes need no session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }

    pub fn allowed_for(&self, role: Role) -> bool {
        self.is_public() || nav_items(role).iter().any(|item| item.route == *self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

const OWNER_NAV: &[NavItem] = &[
    NavItem { label: "Home", route: Route::Home },
    NavItem { label: "Pets", route: Route::Pets },
    NavItem { label: "Book Appointment", route: Route::BookAppointment },
    NavItem { label: "Apply as Doctor", route: Route::ApplyAsDoctor },
    NavItem { label: "Profile", route: Route::Profile },
];

const DOCTOR_NAV: &[NavItem] = &[
    NavItem { label: "Home", route: Route::Home },
    NavItem { label: "Appointment Requests", route: Route::AppointmentRequests },
    NavItem { label: "Profile", route: Route::Profile },
];

pub fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::User => OWNER_NAV,
        Role::Doctor => DOCTOR_NAV,
    }
}
