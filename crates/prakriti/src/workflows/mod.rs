pub mod prakriti;
