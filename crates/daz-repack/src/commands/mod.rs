mod info;
mod pack;

pub use info::{registry_info, RegistryInfoArgs};
pub use pack::{pack_products, PackProductsArgs};
