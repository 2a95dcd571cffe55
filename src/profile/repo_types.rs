/// Partial profile update. `None` leaves the stored value untouched;
/// `profile_image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub profile_color: Option<String>,
    pub profile_image: Option<Option<String>>,
    pub private_watchlist: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.profile_color.is_none()
            && self.profile_image.is_none()
            && self.private_watchlist.is_none()
    }
}
