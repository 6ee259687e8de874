pub mod replay_server;
