/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `accounts`: Registration with automatic trainer assignment
/// - `assignments`: Backfill and a member's assigned trainer
/// - `trainers`: Capacity overview and rosters

pub mod accounts;
pub mod assignments;
pub mod health;
pub mod trainers;
