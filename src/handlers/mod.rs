// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (bearer session token, see middleware::session)
pub mod public; // Tier 1: No authentication required (/, /health, /api/config/public)
pub mod protected; // Tier 2: Session required (/api/*)
