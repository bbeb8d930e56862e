//! Well-known names used by the discovery sources and the default wiring.

/// Interface name under which expression factory providers are discovered.
///
/// Used both as the process property key and as the key inside the
/// platform properties file.
pub const PROVIDER_PROPERTY: &str = "javax.el.ExpressionFactory";

/// Loader-scoped resource naming the provider, one name on the first line.
pub const SERVICE_RESOURCE: &str = "META-INF/services/javax.el.ExpressionFactory";

/// Process property holding the platform root directory.
pub const PLATFORM_ROOT_PROPERTY: &str = "java.home";

/// Path segments appended to the platform root to reach the properties file.
pub const PROPERTY_FILE_SEGMENTS: [&str; 3] = ["jre", "lib", "el.properties"];

/// Provider used when no discovery source names one.
pub const DEFAULT_PROVIDER: &str = "org.apache.el.ExpressionFactoryImpl";
