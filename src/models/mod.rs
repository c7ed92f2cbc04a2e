pub mod ou_process;
