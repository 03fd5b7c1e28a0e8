mod events;
mod excluded_domains;
mod ideas;
