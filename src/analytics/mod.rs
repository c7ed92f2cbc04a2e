pub mod ou_analytic;
