mod response;
pub use self::response::{StatsKeyResponse, UsersResponse};

mod call;
pub use self::call::Call;

mod user;
pub use self::user::{General, PhoneNumber, Telephony, User};
