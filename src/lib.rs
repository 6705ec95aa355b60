//! # grape-lsystem
//!
//! Procedural grapevine and grape-cluster skeletons from parametric L-Systems.
//!
//! Generation runs in two strictly ordered stages:
//!
//! 1. [`GrammarEngine`] rewrites an axiom such as `Ar(3,40)` in parallel passes
//!    until only drawing symbols remain.
//! 2. [`TurtleInterpreter`] walks that string once with a quaternion turtle and a
//!    branch stack, producing a [`GrapeSkeleton`] (points, parent → child edges,
//!    berry attachments) plus the event stream that built it.
//!
//! Turning the skeleton into a skinned mesh is left to the host: implement
//! [`SkeletonSink`] and pass it to [`GrapeSkeleton::build_with`].

pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod pipeline;
pub mod rules;
pub mod skeleton;
pub mod token;
pub mod turtle;

pub use error::*;
pub use grammar::*;
pub use interpreter::*;
pub use pipeline::*;
pub use skeleton::*;
pub use token::*;
pub use turtle::*;
