// handlers/public/mod.rs - Public handlers (no session required)
//
// Route Prefix: none, plus the public client configuration under /api/config
// Middleware: CORS and request tracing only

pub mod config; // GET /api/config/public
pub mod system; // GET / and GET /health
