mod chat_api;
mod notifications;
