//! Core library for edx2gift
//!
//! This crate implements the **Functional Core** of the edx2gift application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The edx2gift project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`edx2gift_core`** (this crate): Pure transformation functions with zero I/O
//! - **`edx2gift`**: File, stdin and HTTP handling (the Imperative Shell)
//!
//! Nothing in this crate logs or touches global state. Conditions worth
//! reporting that do not stop a conversion are returned as
//! [`gift::Warning`]s and the shell decides how to surface them.
//!
//! # Module Organization
//!
//! - [`edx`]: edX problem XML parsed into an owned element tree
//! - [`gift`]: the tree walk producing Moodle GIFT text
//! - [`error`]: conversion failures
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use edx2gift_core::gift::{convert_edx_to_gift, ConvertOptions};
//!
//! let xml = r#"<problem>
//!     <p>Pick the even number</p>
//!     <multiplechoiceresponse>
//!         <choicegroup>
//!             <choice correct="false">3</choice>
//!             <choice correct="true">4</choice>
//!         </choicegroup>
//!     </multiplechoiceresponse>
//! </problem>"#;
//!
//! let conversion = convert_edx_to_gift(xml, &ConvertOptions::default())?;
//! assert_eq!(
//!     conversion.gift(),
//!     "::Q1::[html]<p>Pick the even number</p>{\n\t~3\n\t=4\n}\n"
//! );
//! ```

pub mod edx;
pub mod error;
pub mod gift;

pub use error::ConvertError;
pub use gift::{convert_edx_to_gift, Conversion, ConvertOptions, TitleMode, Warning};
