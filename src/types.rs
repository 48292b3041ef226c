/// Canonical URL string used to decide whether two loads are the same resource.
/// Example: `https://cdn.example.com/app.js`
pub type IdentityKey = String;
/// Tag describing how a resource load was initiated.
/// Examples: `script`, `link`, `css`, `img`
pub type InitiatorType = String;
/// Raw URL as reported by the resource feed (not yet normalized).
/// Example: `https://cdn.example.com/app.js?v=2`
pub type ResourceUrl = String;
/// Warning/log message text.
/// Example: `A script resource was loaded multiple times: https://cdn.example.com/app.js`
pub type LogMessage = String;
