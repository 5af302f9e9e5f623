#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_bind as bind;
pub use vc_bind_format as format;

pub use vc_bind::derive::{Config, ConfigEnum};
pub use vc_bind::{ConfigSerializer, Configuration, Error};
