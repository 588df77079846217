use crate::{Data, Error};

mod admin;
mod ping;

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        ping::ping(),
        admin::status(),
        admin::resync(),
        admin::allow(),
        admin::backup(),
        admin::backups(),
        admin::restore(),
    ]
}
