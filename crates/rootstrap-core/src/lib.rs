mod arch;
mod record;
mod spec;
mod version;

pub use arch::{Arch, ChrootSuffix};
pub use record::{parse_records, records_by_name, strip_version_operator, PackageRecord};
pub use spec::PackageSpec;
pub use version::{compare_versions, ApkVersion};
