// handlers/protected/mod.rs - Protected handlers (session required)
//
// Route Prefix: /api/*
// Middleware: session_middleware injects a SessionContext extension; every
// read goes through a scope taken from that context.

pub mod audit; // GET /api/audit-logs
pub mod auth; // GET /api/auth/whoami
pub mod catalog; // GET /api/tenant, /api/products, /api/orders
pub mod dashboard; // GET /api/dashboard
pub mod payment_methods; // /api/payment-methods/*
pub mod payments; // GET /api/payments
